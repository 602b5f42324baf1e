use splitdiary_domain::{DISPLAY_SCALE, Money};

/// `₹29.70` style. Negative amounts keep their sign after the symbol.
pub fn format_amount(amount: Money, currency: &str) -> String {
    let rounded = amount.round_for_display(DISPLAY_SCALE).as_decimal();
    let scale = DISPLAY_SCALE as usize;
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{currency}{:.scale$}", rounded.abs())
    } else {
        format!("{currency}{:.scale$}", rounded.abs())
    }
}

/// Balance with an explicit `+` for creditors.
pub fn format_signed(amount: Money, currency: &str) -> String {
    let formatted = format_amount(amount, currency);
    if formatted.starts_with('-') {
        formatted
    } else {
        format!("+{formatted}")
    }
}

use crate::{
    money_format::{format_amount, format_signed},
    text_table::{Alignment, TextTableBuilder},
};
use splitdiary_application::{LeaveCheck, LedgerSummary, ParticipantDirectory, ParticipantPosition};
use splitdiary_domain::{ParticipantId, SettlementInstruction, SettlementRecord, SettlementStatus};
use splitdiary_i18n as i18n;
use std::{borrow::Cow, fmt::Write};

pub struct SettlementPresenter;

impl SettlementPresenter {
    pub fn render(
        summary: &LedgerSummary,
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(&mut out, "{}", i18n::BALANCES);
        out.push_str(&Self::build_balance_table(summary, directory, currency));

        if !summary.conserved {
            let residual = format_signed(summary.residual, currency);
            let _ = writeln!(&mut out, "{}", i18n::imbalance(residual));
        }

        if summary.is_settled() {
            let _ = writeln!(&mut out, "\n{}", i18n::ALL_SETTLED_UP);
            return out;
        }

        if !summary.instructions.is_empty() {
            let _ = writeln!(&mut out, "\n{}", i18n::PENDING_SETTLEMENTS);
            out.push_str(&Self::build_instruction_table(
                &summary.instructions,
                directory,
                currency,
            ));
        }

        if !summary.pending_confirmations.is_empty() {
            let _ = writeln!(&mut out, "\n{}", i18n::MARKED_AS_PAID);
            for pending in &summary.pending_confirmations {
                let _ = writeln!(
                    &mut out,
                    "  {}",
                    i18n::marked_as_paid(
                        label(&pending.from, directory),
                        label(&pending.to, directory),
                        format_amount(pending.marked, currency),
                    )
                );
            }
        }

        out
    }

    pub fn build_balance_table(
        summary: &LedgerSummary,
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        let headers = [Cow::Borrowed(i18n::PARTICIPANT), Cow::Borrowed(i18n::BALANCE)];
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers);

        for entry in &summary.balances {
            builder = builder.row([
                label(&entry.id, directory),
                Cow::Owned(format_signed(entry.balance, currency)),
            ]);
        }

        builder.build()
    }

    pub fn build_instruction_table(
        instructions: &[SettlementInstruction],
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        let headers = [
            Cow::Borrowed(i18n::FROM),
            Cow::Borrowed(i18n::TO),
            Cow::Borrowed(i18n::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(instructions.iter().map(|instruction| {
                [
                    label(&instruction.from, directory),
                    label(&instruction.to, directory),
                    Cow::Owned(format_amount(instruction.amount, currency)),
                ]
            }))
            .build()
    }

    /// Every recorded payment, oldest first as stored.
    pub fn render_history(
        records: &[SettlementRecord],
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        if records.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        let _ = writeln!(&mut out, "{}", i18n::SETTLED_TRANSACTIONS);
        for record in records {
            let status = match record.status {
                SettlementStatus::Pending => i18n::STATUS_PENDING,
                SettlementStatus::MarkedPaid => i18n::STATUS_MARKED_PAID,
                SettlementStatus::Confirmed => i18n::STATUS_CONFIRMED,
            };
            let _ = writeln!(
                &mut out,
                "  {}",
                i18n::settled(
                    label(&record.from, directory),
                    label(&record.to, directory),
                    format_amount(record.amount, currency),
                    record.date.format("%Y-%m-%d %H:%M"),
                    status,
                )
            );
        }
        out
    }

    /// Per-participant card: what they receive, pay and have marked.
    pub fn render_position(
        id: &ParticipantId,
        position: &ParticipantPosition,
        instructions: &[SettlementInstruction],
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(
            &mut out,
            "{}: {}",
            label(id, directory),
            format_signed(position.balance, currency)
        );
        let _ = writeln!(
            &mut out,
            "  {}: {}",
            i18n::TO_RECEIVE,
            i18n::payment_count(
                position.to_receive_count,
                format_amount(position.to_receive_total, currency)
            )
        );
        let _ = writeln!(
            &mut out,
            "  {}: {}",
            i18n::TO_PAY,
            i18n::payment_count(
                position.to_pay_count,
                format_amount(position.to_pay_total, currency)
            )
        );
        if !position.awaiting_confirmation.is_zero() {
            let _ = writeln!(
                &mut out,
                "  {}: {}",
                i18n::AWAITING_CONFIRMATION,
                format_amount(position.awaiting_confirmation, currency)
            );
        }

        for instruction in instructions
            .iter()
            .filter(|instruction| &instruction.from == id || &instruction.to == id)
        {
            let _ = writeln!(
                &mut out,
                "  - {}",
                i18n::owes(
                    label(&instruction.from, directory),
                    label(&instruction.to, directory),
                    format_amount(instruction.amount, currency),
                )
            );
        }

        out
    }

    pub fn render_leave_check(
        id: &ParticipantId,
        check: &LeaveCheck,
        directory: &dyn ParticipantDirectory,
        currency: &str,
    ) -> String {
        if check.can_leave() {
            return format!("{}\n", i18n::FREE_TO_LEAVE);
        }

        let mut out = String::new();
        let _ = writeln!(&mut out, "{}\n", i18n::CANNOT_LEAVE);
        if !check.pending_instructions.is_empty() {
            let _ = writeln!(&mut out, "• {}", i18n::HAS_PENDING_SETTLEMENTS);
            for instruction in &check.pending_instructions {
                let amount = format_amount(instruction.amount, currency);
                let line = if &instruction.from == id {
                    i18n::you_owe(label(&instruction.to, directory), amount)
                } else {
                    i18n::owes_you(label(&instruction.from, directory), amount)
                };
                let _ = writeln!(&mut out, "  - {line}");
            }
        }
        if check.has_expenses {
            let _ = writeln!(&mut out, "• {}", i18n::PART_OF_EXPENSES);
        }
        if check.has_settlements {
            let _ = writeln!(&mut out, "• {}", i18n::HAS_SETTLEMENT_RECORDS);
        }
        let _ = writeln!(&mut out, "\n{}", i18n::HOW_TO_LEAVE);
        out
    }
}

fn label<'a>(id: &'a ParticipantId, directory: &'a dyn ParticipantDirectory) -> Cow<'a, str> {
    match directory.display_name(id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Borrowed(id.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use splitdiary_application::ParticipantBalance;
    use splitdiary_domain::{Money, SettlementWorkflow};
    use std::collections::HashMap;

    fn directory() -> HashMap<ParticipantId, String> {
        HashMap::from([
            (ParticipantId::from("a"), "Asha".to_string()),
            (ParticipantId::from("b"), "Ben".to_string()),
        ])
    }

    fn sample_summary() -> LedgerSummary {
        LedgerSummary {
            balances: vec![
                ParticipantBalance {
                    id: "a".into(),
                    balance: Money::new(594, 1),
                },
                ParticipantBalance {
                    id: "b".into(),
                    balance: Money::new(-297, 1),
                },
                ParticipantBalance {
                    id: "c".into(),
                    balance: Money::new(-297, 1),
                },
            ],
            instructions: vec![
                SettlementInstruction {
                    from: "b".into(),
                    to: "a".into(),
                    amount: Money::new(297, 1),
                },
                SettlementInstruction {
                    from: "c".into(),
                    to: "a".into(),
                    amount: Money::new(297, 1),
                },
            ],
            residual: Money::ZERO,
            conserved: true,
            pending_confirmations: Vec::new(),
        }
    }

    #[test]
    fn render_uses_display_name_when_available() {
        let rendered = SettlementPresenter::render(&sample_summary(), &directory(), "₹");

        assert!(rendered.contains("Asha"));
        assert!(rendered.contains("+₹59.40"));
        assert!(rendered.contains("-₹29.70"));
        assert!(rendered.contains(i18n::PENDING_SETTLEMENTS));
        assert!(!rendered.contains(i18n::ALL_SETTLED_UP));
    }

    #[test]
    fn render_falls_back_to_id_when_missing() {
        let rendered = SettlementPresenter::render(&sample_summary(), &directory(), "₹");
        assert!(rendered.lines().any(|line| line.trim_start().starts_with("c ")));
    }

    #[test]
    fn render_settled_diary() {
        let mut summary = sample_summary();
        summary.instructions.clear();
        for entry in &mut summary.balances {
            entry.balance = Money::ZERO;
        }

        let rendered = SettlementPresenter::render(&summary, &directory(), "₹");

        assert!(rendered.contains(i18n::ALL_SETTLED_UP));
        assert!(!rendered.contains(i18n::PENDING_SETTLEMENTS));
    }

    #[test]
    fn render_lists_marked_payments() {
        let mut summary = sample_summary();
        summary.pending_confirmations = SettlementWorkflow::pending_confirmations(&[SettlementRecord {
            id: "s1".to_owned(),
            from: "b".into(),
            to: "a".into(),
            amount: Money::from_i64(10),
            date: Default::default(),
            status: SettlementStatus::MarkedPaid,
            marked_paid_by: None,
            marked_paid_at: None,
        }]);

        let rendered = SettlementPresenter::render(&summary, &directory(), "₹");

        assert!(rendered.contains(i18n::MARKED_AS_PAID));
        assert!(rendered.contains("Ben marked ₹10.00 as paid to Asha"));
    }

    #[test]
    fn render_warns_on_imbalance() {
        let mut summary = sample_summary();
        summary.residual = Money::new(5, 1);
        summary.conserved = false;

        let rendered = SettlementPresenter::render(&summary, &directory(), "₹");
        assert!(rendered.contains("Balances are off by +₹0.50"));
    }

    #[test]
    fn history_lists_every_record_with_status() {
        let at = Utc
            .with_ymd_and_hms(2024, 3, 3, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        let record = |id: &str, from: &str, amount: i64, status| SettlementRecord {
            id: id.to_owned(),
            from: from.into(),
            to: "a".into(),
            amount: Money::from_i64(amount),
            date: at,
            status,
            marked_paid_by: None,
            marked_paid_at: None,
        };
        let records = [
            record("s1", "b", 10, SettlementStatus::Confirmed),
            record("s2", "c", 4, SettlementStatus::MarkedPaid),
        ];

        let rendered = SettlementPresenter::render_history(&records, &directory(), "₹");

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            [
                i18n::SETTLED_TRANSACTIONS,
                "  Ben paid Asha ₹10.00 on 2024-03-03 08:00 (confirmed)",
                "  c paid Asha ₹4.00 on 2024-03-03 08:00 (marked as paid)",
            ]
        );
        assert!(SettlementPresenter::render_history(&[], &directory(), "₹").is_empty());
    }

    #[test]
    fn position_lists_own_instructions() {
        let summary = sample_summary();
        let position = ParticipantPosition {
            balance: Money::new(-297, 1),
            to_pay_count: 1,
            to_pay_total: Money::new(297, 1),
            ..ParticipantPosition::default()
        };

        let rendered = SettlementPresenter::render_position(
            &"b".into(),
            &position,
            &summary.instructions,
            &directory(),
            "₹",
        );

        assert!(rendered.starts_with("Ben: -₹29.70"));
        assert!(rendered.contains("To pay: 1 payment, ₹29.70"));
        assert!(rendered.contains("Ben owes Asha ₹29.70"));
        assert!(!rendered.contains("c owes"));
    }

    #[test]
    fn leave_check_explains_blockers() {
        let check = LeaveCheck {
            has_expenses: true,
            has_settlements: false,
            pending_instructions: vec![SettlementInstruction {
                from: "a".into(),
                to: "b".into(),
                amount: Money::from_i64(5),
            }],
        };

        let rendered =
            SettlementPresenter::render_leave_check(&"b".into(), &check, &directory(), "₹");

        assert!(rendered.starts_with(i18n::CANNOT_LEAVE));
        assert!(rendered.contains("Asha owes you ₹5.00"));
        assert!(rendered.contains(i18n::PART_OF_EXPENSES));
        assert!(!rendered.contains(i18n::HAS_SETTLEMENT_RECORDS));
    }
}

use crate::{
    money_format::{format_amount, format_signed},
    split_presenter::SplitPresenter,
};
use splitdiary_application::{DiarySnapshot, ParticipantDirectory};
use splitdiary_domain::{Expense, ParticipantId, SplitState};
use splitdiary_i18n as i18n;
use std::fmt::Write;

pub struct ExpensePresenter;

impl ExpensePresenter {
    /// Expenses grouped by event. With a `viewer`, every expense they take
    /// part in also shows how it moves their balance.
    pub fn render(
        snapshot: &DiarySnapshot,
        viewer: Option<&ParticipantId>,
        currency: &str,
    ) -> String {
        let groups = snapshot.expenses_by_event();
        if groups.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        let _ = writeln!(&mut out, "{}", i18n::EXPENSES);
        for group in groups {
            let _ = writeln!(
                &mut out,
                "\n{}",
                i18n::event_heading(group.name, group.expenses.len())
            );
            for expense in group.expenses {
                out.push_str(&Self::render_expense(expense, snapshot, viewer, currency));
            }
        }
        out
    }

    fn render_expense(
        expense: &Expense,
        directory: &dyn ParticipantDirectory,
        viewer: Option<&ParticipantId>,
        currency: &str,
    ) -> String {
        let payer = directory
            .display_name(expense.paid_by())
            .unwrap_or(expense.paid_by().as_str());
        let mut out = String::new();
        let _ = writeln!(
            &mut out,
            "{}",
            i18n::expense_heading(
                expense.description(),
                format_amount(expense.amount(), currency),
                payer
            )
        );

        let state = SplitState::from_parts(
            expense.participants().clone(),
            expense.splits().clone(),
            expense.frozen_splits().clone(),
        );
        out.push_str(&SplitPresenter::render(&state, directory));

        if let Some(viewer) = viewer
            && (expense.paid_by() == viewer || expense.participants().contains(viewer))
        {
            let effect = format_signed(expense.net_effect_for(viewer), currency);
            let _ = writeln!(&mut out, "{}", i18n::your_balance(effect));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use indexmap::IndexMap;
    use rstest::{fixture, rstest};
    use splitdiary_application::{DiaryEvent, DiaryId, DiaryPerson, SkippedRecords};
    use splitdiary_domain::{ExpenseDraft, Money, SplitMap, SplitMode};

    fn expense(id: &str, amount: i64, paid_by: &str, event_id: &str) -> Expense {
        Expense::try_new(ExpenseDraft {
            id: id.to_owned(),
            description: id.to_owned(),
            amount: Money::from_i64(amount),
            paid_by: paid_by.into(),
            participants: vec!["a".into(), "b".into()],
            splits: SplitMap::from_iter([("a".into(), 50), ("b".into(), 50)]),
            date: DateTime::<Utc>::UNIX_EPOCH,
            event_id: Some(event_id.to_owned()),
            split_mode: SplitMode::Equal,
            frozen_splits: Vec::new(),
        })
        .expect("valid expense")
    }

    #[fixture]
    fn snapshot() -> DiarySnapshot {
        let person = |name: &str| DiaryPerson {
            name: name.to_owned(),
            user_id: None,
        };
        DiarySnapshot {
            diary_id: DiaryId::new("trip"),
            name: "Trip".to_owned(),
            participants: ["a", "b", "c"].into_iter().collect(),
            people: IndexMap::from_iter([
                (ParticipantId::from("a"), person("Asha")),
                (ParticipantId::from("b"), person("Ben")),
                (ParticipantId::from("c"), person("Chen")),
            ]),
            events: vec![
                DiaryEvent::general(),
                DiaryEvent {
                    id: "day-1".to_owned(),
                    name: "Day 1".to_owned(),
                    order: 1,
                },
            ],
            expenses: vec![
                expense("Ferry", 60, "a", "day-1"),
                expense("Snacks", 20, "b", "general"),
            ],
            settlements: Vec::new(),
            skipped: SkippedRecords::default(),
        }
    }

    #[rstest]
    fn groups_expenses_under_event_headings(snapshot: DiarySnapshot) {
        let rendered = ExpensePresenter::render(&snapshot, None, "₹");

        let general = rendered.find("General Expenses (1)").expect("general heading");
        let snacks = rendered.find("Snacks: ₹20.00 paid by Ben").expect("snacks line");
        let day_one = rendered.find("Day 1 (1)").expect("day heading");
        let ferry = rendered.find("Ferry: ₹60.00 paid by Asha").expect("ferry line");
        assert!(general < snacks && snacks < day_one && day_one < ferry);
        assert!(!rendered.contains("Your balance"));
    }

    #[rstest]
    fn viewer_sees_their_balance_per_expense(snapshot: DiarySnapshot) {
        let rendered = ExpensePresenter::render(&snapshot, Some(&"a".into()), "₹");

        let lines: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("Your balance"))
            .collect();
        assert_eq!(lines, ["Your balance: -₹10.00", "Your balance: +₹30.00"]);
    }

    #[rstest]
    fn bystander_gets_no_balance_lines(snapshot: DiarySnapshot) {
        let rendered = ExpensePresenter::render(&snapshot, Some(&"c".into()), "₹");
        assert!(!rendered.contains("Your balance"));
    }

    #[rstest]
    fn empty_diary_renders_nothing(mut snapshot: DiarySnapshot) {
        snapshot.expenses.clear();
        assert!(ExpensePresenter::render(&snapshot, None, "₹").is_empty());
    }
}

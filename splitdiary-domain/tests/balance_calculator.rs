use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use proptest::prelude::*;
use splitdiary_domain::{
    BalanceCalculator, Expense, ExpenseDraft, Money, ParticipantBalances, ParticipantId,
    ParticipantList, SETTLEMENT_TOLERANCE, SettlementCalculator, SettlementRecord,
    SettlementStatus, SplitMode, services::equal_split,
};

fn participants(count: usize) -> ParticipantList {
    (0..count)
        .map(|idx| ParticipantId::new(format!("p{idx}")))
        .collect()
}

fn equal_expense(
    id: usize,
    amount: Money,
    paid_by: ParticipantId,
    members: ParticipantList,
) -> Expense {
    let splits = equal_split(&members).expect("non-empty members");
    Expense::try_new(ExpenseDraft {
        id: format!("e{id}"),
        description: "Groceries".to_owned(),
        amount,
        paid_by,
        participants: members.iter().cloned().collect(),
        splits,
        date: DateTime::<Utc>::UNIX_EPOCH,
        event_id: None,
        split_mode: SplitMode::Equal,
        frozen_splits: Vec::new(),
    })
    .expect("equal split is always valid")
}

fn record(idx: usize, from: ParticipantId, to: ParticipantId, amount: Money) -> SettlementRecord {
    SettlementRecord {
        id: format!("s{idx}"),
        from,
        to,
        amount,
        date: DateTime::<Utc>::UNIX_EPOCH,
        status: SettlementStatus::Confirmed,
        marked_paid_by: None,
        marked_paid_at: None,
    }
}

proptest! {
    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=8,
        expenses in prop::collection::vec((0i64..=1_000_000, 0usize..8, 1u8..=255), 0..=20),
        settlements in prop::collection::vec((1i64..=100_000, 0usize..8, 0usize..8), 0..=10),
    ) {
        let members = participants(member_count);

        let expenses: Vec<Expense> = expenses
            .into_iter()
            .enumerate()
            .map(|(idx, (cents, payer, mask))| {
                let mut subset: ParticipantList = members
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, id)| id.clone())
                    .collect();
                if subset.is_empty() {
                    subset = members.clone();
                }
                let payer = members.get(payer % member_count).cloned().expect("in range");
                equal_expense(idx, Money::new(cents, 2), payer, subset)
            })
            .collect();

        let settlements: Vec<SettlementRecord> = settlements
            .into_iter()
            .enumerate()
            .map(|(idx, (cents, from, to))| {
                record(
                    idx,
                    members.get(from % member_count).cloned().expect("in range"),
                    members.get(to % member_count).cloned().expect("in range"),
                    Money::new(cents, 2),
                )
            })
            .collect();

        let balances = BalanceCalculator::compute(&expenses, &settlements, &members);

        prop_assert_eq!(balances.len(), member_count);
        prop_assert!(BalanceCalculator::is_conserved(&balances));
    }
}

proptest! {
    #[test]
    fn instructions_pay_out_every_balance(
        raw in prop::collection::vec(-5_000i64..=5_000, 1..=9),
    ) {
        let mut balances: ParticipantBalances = raw
            .iter()
            .enumerate()
            .map(|(idx, amount)| (ParticipantId::new(format!("p{idx}")), Money::from_i64(*amount)))
            .collect();
        let closing: Money = -balances.values().sum::<Money>();
        balances.insert(ParticipantId::new("closing"), closing);

        let instructions = SettlementCalculator.simplify(&balances);

        let mut received: IndexMap<&ParticipantId, Money> = IndexMap::new();
        let mut paid: IndexMap<&ParticipantId, Money> = IndexMap::new();
        for instruction in &instructions {
            prop_assert!(instruction.amount > SETTLEMENT_TOLERANCE);
            prop_assert_ne!(&instruction.from, &instruction.to);
            *received.entry(&instruction.to).or_default() += instruction.amount;
            *paid.entry(&instruction.from).or_default() += instruction.amount;
        }

        for (id, balance) in &balances {
            let expected_in = if *balance > Money::ZERO { *balance } else { Money::ZERO };
            let expected_out = if *balance < Money::ZERO { -*balance } else { Money::ZERO };
            let actual_in = received.get(id).copied().unwrap_or_default();
            let actual_out = paid.get(id).copied().unwrap_or_default();
            prop_assert!((actual_in - expected_in).abs() <= SETTLEMENT_TOLERANCE);
            prop_assert!((actual_out - expected_out).abs() <= SETTLEMENT_TOLERANCE);
        }

        let open = balances.values().filter(|balance| !balance.is_zero()).count();
        prop_assert!(instructions.len() <= open.saturating_sub(1));
    }
}

proptest! {
    #[test]
    fn near_zero_balances_need_no_instructions(
        raw in prop::collection::vec(-1i64..=1, 0..=12),
    ) {
        let balances: ParticipantBalances = raw
            .iter()
            .enumerate()
            .map(|(idx, cents)| (ParticipantId::new(format!("p{idx}")), Money::new(*cents, 2)))
            .collect();

        prop_assert!(SettlementCalculator.simplify(&balances).is_empty());
    }
}

#[test]
fn three_friends_dinner_settles_to_payer() {
    let members: ParticipantList = ["A", "B", "C"].into_iter().collect();
    let dinner = equal_expense(0, Money::from_i64(90), "A".into(), members.clone());
    assert_eq!(dinner.split_of(&"A".into()), 34);

    let balances = BalanceCalculator::compute([&dinner], [], &members);
    let instructions = SettlementCalculator.simplify(&balances);

    let to_a: Money = instructions
        .iter()
        .filter(|instruction| instruction.to.as_str() == "A")
        .map(|instruction| instruction.amount)
        .sum();
    assert_eq!(instructions.len(), 2);
    assert_eq!(to_a, Money::new(594, 1));
    assert!(
        instructions
            .iter()
            .all(|instruction| instruction.amount == Money::new(297, 1))
    );
}

#[test]
fn recorded_payment_clears_the_debt() {
    let members: ParticipantList = ["X", "Y"].into_iter().collect();
    let taxi = equal_expense(0, Money::from_i64(100), "X".into(), members.clone());
    let payback = record(0, "Y".into(), "X".into(), Money::from_i64(50));

    let balances = BalanceCalculator::compute([&taxi], [&payback], &members);

    assert!(balances.values().all(|balance| balance.is_zero()));
    assert!(SettlementCalculator.simplify(&balances).is_empty());
}

//! Journal entry validation.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryTotals, LineInput};

/// Validates a set of journal lines against the double-entry rules.
///
/// Rejects empty entries, non-positive amounts, and entries whose debit and
/// credit totals disagree by more than the balance tolerance. On success,
/// returns the computed totals so callers do not sum twice.
///
/// # Errors
///
/// Returns [`LedgerError::NoLines`], [`LedgerError::ZeroAmount`],
/// [`LedgerError::NegativeAmount`], or [`LedgerError::Unbalanced`].
pub fn validate_lines(lines: &[LineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::NoLines);
    }

    for line in lines {
        if line.amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount { account: line.account_id });
        }
        if line.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { account: line.account_id });
        }
    }

    let totals = EntryTotals::of(lines);
    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced {
            debits: totals.debits,
            credits: totals.credits,
            difference: totals.difference(),
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbook_shared::types::AccountId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use crate::ledger::account::Side;

    fn acct(id: i64) -> AccountId {
        AccountId::new(id)
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert_eq!(validate_lines(&[]), Err(LedgerError::NoLines));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let lines = vec![
            LineInput::debit(acct(1), dec!(0)),
            LineInput::credit(acct(2), dec!(0)),
        ];
        assert_eq!(validate_lines(&lines), Err(LedgerError::ZeroAmount { account: acct(1) }));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let lines = vec![
            LineInput::debit(acct(1), dec!(-50)),
            LineInput::credit(acct(2), dec!(-50)),
        ];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::NegativeAmount { account: acct(1) })
        );
    }

    #[test]
    fn test_unbalanced_rejected() {
        let lines = vec![
            LineInput::debit(acct(1), dec!(100.00)),
            LineInput::credit(acct(2), dec!(99.98)),
        ];
        let err = validate_lines(&lines).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unbalanced {
                debits: dec!(100.00),
                credits: dec!(99.98),
                difference: dec!(0.02),
            }
        );
    }

    #[test]
    fn test_one_cent_difference_tolerated() {
        let lines = vec![
            LineInput::debit(acct(1), dec!(100.00)),
            LineInput::credit(acct(2), dec!(99.99)),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.difference(), dec!(0.01));
    }

    #[test]
    fn test_balanced_multi_line_entry() {
        let lines = vec![
            LineInput::debit(acct(1), dec!(700)),
            LineInput::debit(acct(2), dec!(300)),
            LineInput::credit(acct(3), dec!(250)),
            LineInput::credit(acct(4), dec!(750)),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.debits, dec!(1000));
        assert_eq!(totals.credits, dec!(1000));
    }

    proptest! {
        /// Mirrored debit/credit pairs always validate, whatever the amounts.
        #[test]
        fn prop_mirrored_pairs_always_balance(amounts in prop::collection::vec(1i64..=10_000_000, 1..20)) {
            let mut lines = Vec::new();
            for (i, cents) in amounts.iter().enumerate() {
                let amount = Decimal::new(*cents, 2);
                let i = i64::try_from(i).unwrap();
                lines.push(LineInput::debit(acct(i * 2 + 1), amount));
                lines.push(LineInput::credit(acct(i * 2 + 2), amount));
            }
            let totals = validate_lines(&lines).unwrap();
            prop_assert_eq!(totals.debits, totals.credits);
        }

        /// A skew beyond one cent is always rejected.
        #[test]
        fn prop_skewed_entries_rejected(cents in 1i64..=10_000_000, skew in 2i64..=1000) {
            let lines = vec![
                LineInput::debit(acct(1), Decimal::new(cents + skew, 2)),
                LineInput::credit(acct(2), Decimal::new(cents, 2)),
            ];
            let err = validate_lines(&lines).unwrap_err();
            prop_assert!(
                matches!(err, LedgerError::Unbalanced { .. }),
                "expected LedgerError::Unbalanced, got {:?}",
                err
            );
        }

        /// Validation never panics on arbitrary line sets.
        #[test]
        fn prop_no_panic(
            raw in prop::collection::vec((any::<i64>(), any::<bool>(), -1_000_000i64..=1_000_000), 0..12)
        ) {
            let lines: Vec<LineInput> = raw
                .iter()
                .map(|(id, is_debit, cents)| LineInput {
                    account_id: acct(*id),
                    side: if *is_debit { Side::Debit } else { Side::Credit },
                    amount: Decimal::new(*cents, 2),
                })
                .collect();
            let _ = validate_lines(&lines);
        }
    }
}

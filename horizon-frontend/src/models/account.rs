use serde::{Deserialize, Serialize};

/// A linked bank and its current balance. Display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub bank_name: String,
    pub current_balance: f64,
}

/// Totals shown in the balance box.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOverview {
    pub total_banks: usize,
    pub total_current_balance: f64,
}

impl BalanceOverview {
    pub fn from_accounts(accounts: &[AccountSummary]) -> Self {
        Self {
            total_banks: accounts.len(),
            total_current_balance: accounts.iter().map(|a| a.current_balance).sum(),
        }
    }
}

/// Format an amount as US dollars, e.g. `$1,234.56` or `-$0.50`.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(999.5), "$999.50");
        assert_eq!(format_amount(1234.56), "$1,234.56");
        assert_eq!(format_amount(120234532.23), "$120,234,532.23");
        assert_eq!(format_amount(-1234.5), "-$1,234.50");
    }

    #[test]
    fn test_overview_totals() {
        let accounts = vec![
            AccountSummary {
                bank_name: "Chase".to_string(),
                current_balance: 9123422.29,
            },
            AccountSummary {
                bank_name: "Wells Fargo".to_string(),
                current_balance: 5847392.02,
            },
        ];

        let overview = BalanceOverview::from_accounts(&accounts);
        assert_eq!(overview.total_banks, 2);
        assert_eq!(format_amount(overview.total_current_balance), "$14,970,814.31");
    }

    #[test]
    fn test_empty_overview() {
        let overview = BalanceOverview::from_accounts(&[]);
        assert_eq!(overview.total_banks, 0);
        assert_eq!(overview.total_current_balance, 0.0);
    }
}

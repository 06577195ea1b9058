use crate::error::ErrorKind;
use crate::money::Money;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankrollError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Money, available: Money },
}

impl BankrollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankrollError::InsufficientFunds { .. } => ErrorKind::InvalidAction,
        }
    }
}

/// Funds a player draws wagers from and receives returns into.
pub trait Bankroll {
    fn balance(&self) -> Money;
    fn withdraw(&mut self, amount: Money) -> Result<(), BankrollError>;
    fn deposit(&mut self, amount: Money);

    fn can_cover(&self, amount: Money) -> bool {
        self.balance() >= amount
    }
}

/// A plain in-memory balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wallet {
    balance: Money,
}

impl Wallet {
    pub fn new(balance: Money) -> Self {
        Self { balance }
    }
}

impl Bankroll for Wallet {
    fn balance(&self) -> Money {
        self.balance
    }

    fn withdraw(&mut self, amount: Money) -> Result<(), BankrollError> {
        self.balance = self.balance.checked_sub(amount).ok_or(
            BankrollError::InsufficientFunds { needed: amount, available: self.balance },
        )?;
        Ok(())
    }

    fn deposit(&mut self, amount: Money) {
        self.balance += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_leaves_balance_alone_on_failure() {
        let mut w = Wallet::new(Money::from_units(5));
        let err = w.withdraw(Money::from_units(6)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
        assert_eq!(w.balance(), Money::from_units(5));
        w.withdraw(Money::from_units(5)).unwrap();
        assert!(w.balance().is_zero());
        w.deposit(Money::from_units(2));
        assert!(w.can_cover(Money::from_units(2)));
        assert!(!w.can_cover(Money::from_units(3)));
    }
}

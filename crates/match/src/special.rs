use serde::{Deserialize, Serialize};

/// Structural transaction kinds detected from text shape alone. These bypass
/// merchant matching entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTransactionType {
    Roundup,
    CurrencyExchange,
    Transfer,
    Deposit,
    AtmWithdrawal,
    Commission,
    /// Reserved for a hard-exclusion policy. No rule currently produces it;
    /// dropping transactions would break batch integrity.
    Exclude,
}

impl SpecialTransactionType {
    /// The category a special type forces, if any. Commissions are real
    /// spending and land in "Other"; every other special type is money
    /// movement and stays uncategorized.
    pub fn forced_category(self) -> Option<&'static str> {
        match self {
            SpecialTransactionType::Commission => Some("Other"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpecialTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecialTransactionType::Roundup => write!(f, "roundup"),
            SpecialTransactionType::CurrencyExchange => write!(f, "currency_exchange"),
            SpecialTransactionType::Transfer => write!(f, "transfer"),
            SpecialTransactionType::Deposit => write!(f, "deposit"),
            SpecialTransactionType::AtmWithdrawal => write!(f, "atm_withdrawal"),
            SpecialTransactionType::Commission => write!(f, "commission"),
            SpecialTransactionType::Exclude => write!(f, "exclude"),
        }
    }
}

/// Classifies a description into a special transaction kind, or `None` when
/// ordinary merchant matching should run.
///
/// Rules are keyword-based and evaluated in a fixed priority order (roundup,
/// currency exchange, transfer, deposit, commission, ATM withdrawal), so at
/// most one type ever comes back. The description should already be in the
/// system's working language.
pub fn detect_special_type(description: &str) -> Option<SpecialTransactionType> {
    let desc = description.to_lowercase();
    if desc.trim().is_empty() {
        return None;
    }

    let has = |needle: &str| desc.contains(needle);

    // Round-up savings: money shuffled into the account, not spending.
    if has("roundup")
        || has("round up")
        || (has("adding money") && has("account"))
        || (has("account") && has("balance") && (has("add") || has("round")))
        || (has("electronic") && has("service") && (has("account") || has("balance")))
    {
        return Some(SpecialTransactionType::Roundup);
    }

    // Currency staying on the account, changing denomination.
    if has("currency exchange")
        || has("currency conversion")
        || has("cashless conversion")
        || (has("conversion") && !has("payment"))
        || (has("convert") && (has("currency") || has("cashless")))
        || (has("exchange") && has("currency"))
    {
        return Some(SpecialTransactionType::CurrencyExchange);
    }

    if has("private transfer")
        || has("money transfer")
        || has("transfer from")
        || has("transfer to")
        || (has("transfer") && (has("private") || has("bank")))
    {
        return Some(SpecialTransactionType::Transfer);
    }

    if has("card deposit")
        || has("deposit to card")
        || has("top up card")
        || has("card top up")
        || (has("deposit") && has("card"))
    {
        return Some(SpecialTransactionType::Deposit);
    }

    // "payment" guards against merchants like "commission-free payment co".
    if (has("commission") && !has("payment"))
        || (has("service fee") && !has("payment"))
        || (has("transaction fee") && !has("payment"))
    {
        return Some(SpecialTransactionType::Commission);
    }

    if has("atm")
        || ((has("cash withdrawal") || has("withdrawal"))
            && (has("cash") || has("card operation")))
    {
        return Some(SpecialTransactionType::AtmWithdrawal);
    }

    None
}

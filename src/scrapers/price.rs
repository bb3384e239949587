//! Free-text price fragments to a canonical monthly AMD amount.
//!
//! A fragment either carries an explicit billing period ("58,000 ֏ ամսական",
//! "$700 օրական") or is a bare dram amount ("150,000 ֏"). Bare amounts are
//! only accepted when they land inside the plausibility band as a monthly
//! price, or as a daily price scaled to a month. Anything else is a sale
//! price or an unrelated number.

use regex::Regex;
use std::sync::OnceLock;

static TAGGED: OnceLock<Regex> = OnceLock::new();
static BARE: OnceLock<Regex> = OnceLock::new();

const MONTHLY_WORD: &str = "ամսական";
const DAILY_WORD: &str = "օրական";

/// Days in an average month.
pub const DAYS_PER_MONTH: f64 = 365.0 / 12.0;

fn tagged_regex() -> &'static Regex {
    TAGGED.get_or_init(|| {
        Regex::new(r"^([$€])?\s*([\d,]+)\s*(?:֏)?\s*(ամսական|օրական)").unwrap()
    })
}

fn bare_regex() -> &'static Regex {
    BARE.get_or_init(|| Regex::new(r"^([\d,]+)\s*֏").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Dram,
    Dollar,
    Euro,
}

impl Currency {
    fn from_symbol(symbol: Option<&str>) -> Self {
        match symbol {
            Some("$") => Currency::Dollar,
            Some("€") => Currency::Euro,
            _ => Currency::Dram,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Billing {
    Monthly,
    Daily,
}

impl Billing {
    fn from_word(word: &str) -> Self {
        if word == DAILY_WORD {
            Billing::Daily
        } else {
            debug_assert_eq!(word, MONTHLY_WORD);
            Billing::Monthly
        }
    }

    fn monthly_factor(self) -> f64 {
        match self {
            Billing::Monthly => 1.0,
            Billing::Daily => DAYS_PER_MONTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceNormalizer {
    /// Exclusive lower bound of a plausible monthly rent
    pub min_monthly: f64,
    /// Exclusive upper bound of a plausible monthly rent
    pub max_monthly: f64,
    pub usd_rate: f64,
    pub eur_rate: f64,
    /// Also band-check prices that carry an explicit billing period
    pub bound_tagged: bool,
}

impl Default for PriceNormalizer {
    fn default() -> Self {
        Self {
            min_monthly: 75_000.0,
            max_monthly: 300_000.0,
            usd_rate: 430.0,
            eur_rate: 445.0,
            bound_tagged: false,
        }
    }
}

impl PriceNormalizer {
    pub fn normalize(&self, text: &str) -> Option<f64> {
        let text = text.trim();

        if let Some(caps) = tagged_regex().captures(text) {
            let currency = Currency::from_symbol(caps.get(1).map(|m| m.as_str()));
            let amount = parse_amount(&caps[2])?;
            let billing = Billing::from_word(&caps[3]);

            let price = amount * billing.monthly_factor() * self.rate(currency);
            if self.bound_tagged && !self.is_plausible(price) {
                return None;
            }
            return Some(price);
        }

        let caps = bare_regex().captures(text)?;
        let amount = parse_amount(&caps[1])?;
        if self.is_plausible(amount) {
            return Some(amount);
        }
        let daily = amount * DAYS_PER_MONTH;
        if self.is_plausible(daily) {
            return Some(daily);
        }
        None
    }

    pub fn is_plausible(&self, monthly: f64) -> bool {
        self.min_monthly < monthly && monthly < self.max_monthly
    }

    fn rate(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Dram => 1.0,
            Currency::Dollar => self.usd_rate,
            Currency::Euro => self.eur_rate,
        }
    }
}

/// "1,250,000" -> 1250000.0
fn parse_amount(digits: &str) -> Option<f64> {
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<u64>().ok().map(|n| n as f64)
}

use serde::{Deserialize, Deserializer, Serialize};

/// The six monetary fields carried by every transaction and aggregate: three
/// credit columns and three debit columns, each non-negative.
///
/// Amount fields are lenient on input: a missing, null, or non-numeric value
/// deserializes as `0.0`. Malformed amounts never abort an aggregation; that
/// is the documented contract for imported data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Flows {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub deposit: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub other_deposit: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub up_line_deposit: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub penal_withdrawal: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub other_withdrawal: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub up_line_withdrawal: f64,
}

impl Flows {
    pub fn credits(&self) -> f64 {
        self.deposit + self.other_deposit + self.up_line_deposit
    }

    pub fn debits(&self) -> f64 {
        self.penal_withdrawal + self.other_withdrawal + self.up_line_withdrawal
    }

    pub fn net(&self) -> f64 {
        self.credits() - self.debits()
    }

    pub fn is_zero(&self) -> bool {
        self.credits() == 0.0 && self.debits() == 0.0
    }

    /// Field-wise accumulation, used when folding transactions into an
    /// account aggregate and account aggregates into the overall one.
    pub fn accumulate(&mut self, other: &Flows) {
        self.deposit += other.deposit;
        self.other_deposit += other.other_deposit;
        self.up_line_deposit += other.up_line_deposit;
        self.penal_withdrawal += other.penal_withdrawal;
        self.other_withdrawal += other.other_withdrawal;
        self.up_line_withdrawal += other.up_line_withdrawal;
    }
}

/// Accepts a number, a numeric string, or null; anything else becomes `0.0`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(value) if value.is_finite() => value,
        Raw::Number(_) => 0.0,
        Raw::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        Raw::Other(_) => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_is_credits_minus_debits() {
        let flows = Flows {
            deposit: 200.0,
            other_deposit: 25.0,
            up_line_deposit: 10.0,
            penal_withdrawal: 50.0,
            other_withdrawal: 5.0,
            up_line_withdrawal: 15.0,
        };
        assert_eq!(flows.credits(), 235.0);
        assert_eq!(flows.debits(), 70.0);
        assert_eq!(flows.net(), 165.0);
    }

    #[test]
    fn malformed_amounts_coerce_to_zero() {
        let flows: Flows = serde_json::from_str(
            r#"{
                "deposit": "120.5",
                "other_deposit": null,
                "up_line_deposit": "not a number",
                "penal_withdrawal": {"nested": true},
                "other_withdrawal": 3.25
            }"#,
        )
        .expect("lenient parse");
        assert_eq!(flows.deposit, 120.5);
        assert_eq!(flows.other_deposit, 0.0);
        assert_eq!(flows.up_line_deposit, 0.0);
        assert_eq!(flows.penal_withdrawal, 0.0);
        assert_eq!(flows.other_withdrawal, 3.25);
        assert_eq!(flows.up_line_withdrawal, 0.0);
    }
}

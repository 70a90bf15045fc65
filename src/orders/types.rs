use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::orders::{DEFAULT_DISTANCE, DEFAULT_LIMIT_PRICE};

/// Wall-clock format used for scheduled times, local time, no zone.
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    #[default]
    Cash,
    Margin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    /// Signed take-profit offset. Profit lies above entry for a buy, below for a sell.
    pub fn take_profit_offset(self, distance: i64) -> i64 {
        match self {
            Side::Buy => distance,
            Side::Sell => distance.saturating_neg(),
        }
    }

    /// Signed stop-loss offset, always on the opposite side of the take-profit.
    pub fn stop_loss_offset(self, distance: i64) -> i64 {
        self.take_profit_offset(distance).saturating_neg()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Market,
    Limit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Immediate,
    Scheduled,
}

/// When a batch should be handed to the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "run_mode", rename_all = "lowercase")]
pub enum RunPlan {
    Immediate,
    Scheduled {
        #[serde(with = "schedule_format")]
        at: NaiveDateTime,
    },
}

impl RunPlan {
    pub fn mode(&self) -> RunMode {
        match self {
            RunPlan::Immediate => RunMode::Immediate,
            RunPlan::Scheduled { .. } => RunMode::Scheduled,
        }
    }

    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        match self {
            RunPlan::Immediate => None,
            RunPlan::Scheduled { at } => Some(*at),
        }
    }
}

/// Raw values of one order row, exactly as the operator left them.
///
/// Numbers are signed so that out-of-range input reaches the validator
/// instead of failing to deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRowInput {
    pub symbol: String,
    pub product: Product,
    pub side: Side,
    pub entry_type: EntryType,
    pub limit_price: i64,
    pub stop_loss_distance: i64,
    pub take_profit_distance: i64,
}

impl Default for OrderRowInput {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            product: Product::default(),
            side: Side::default(),
            entry_type: EntryType::default(),
            limit_price: DEFAULT_LIMIT_PRICE,
            stop_loss_distance: DEFAULT_DISTANCE,
            take_profit_distance: DEFAULT_DISTANCE,
        }
    }
}

impl OrderRowInput {
    pub fn trimmed_symbol(&self) -> &str {
        self.symbol.trim()
    }

    /// Limit price is only editable for limit entries.
    pub fn limit_price_enabled(&self) -> bool {
        self.entry_type == EntryType::Limit
    }
}

/// Partial edit of a row. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RowPatch {
    pub symbol: Option<String>,
    pub product: Option<Product>,
    pub side: Option<Side>,
    pub entry_type: Option<EntryType>,
    pub limit_price: Option<i64>,
    pub stop_loss_distance: Option<i64>,
    pub take_profit_distance: Option<i64>,
}

impl RowPatch {
    pub fn apply(self, row: &mut OrderRowInput) {
        if let Some(v) = self.symbol {
            row.symbol = v;
        }
        if let Some(v) = self.product {
            row.product = v;
        }
        if let Some(v) = self.side {
            row.side = v;
        }
        if let Some(v) = self.entry_type {
            row.entry_type = v;
        }
        if let Some(v) = self.limit_price {
            row.limit_price = v;
        }
        if let Some(v) = self.stop_loss_distance {
            row.stop_loss_distance = v;
        }
        if let Some(v) = self.take_profit_distance {
            row.take_profit_distance = v;
        }
    }
}

/// Fixed fields supplied by configuration rather than by the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDefaults {
    #[serde(default = "default_exchange")]
    pub exchange: u32,
    #[serde(default = "default_qty")]
    pub qty: u32,
    #[serde(default = "default_batch_name")]
    pub batch_name: String,
    #[serde(default)]
    pub memo: String,
}

fn default_exchange() -> u32 {
    crate::constants::orders::DEFAULT_EXCHANGE
}

fn default_qty() -> u32 {
    crate::constants::orders::DEFAULT_QTY
}

fn default_batch_name() -> String {
    crate::constants::orders::DEFAULT_BATCH_NAME.to_string()
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            qty: default_qty(),
            batch_name: default_batch_name(),
            memo: String::new(),
        }
    }
}

/// A normalized order, ready for the broker/persistence collaborator.
///
/// Fields are private: the signed offsets can only come out of
/// [`crate::orders::normalize`], so they always agree with `side`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    symbol: String,
    exchange: u32,
    product: Product,
    side: Side,
    qty: u32,
    entry_type: EntryType,
    entry_price: Option<i64>,
    take_profit_signed: i64,
    stop_loss_signed: i64,
    batch_name: String,
    memo: String,
    run_mode: RunMode,
    #[serde(default, with = "schedule_format::option")]
    scheduled_at: Option<NaiveDateTime>,
}

impl OrderSubmission {
    pub(crate) fn from_row(row: &OrderRowInput, plan: &RunPlan, defaults: &OrderDefaults) -> Self {
        let entry_price = match row.entry_type {
            EntryType::Limit => Some(row.limit_price),
            EntryType::Market => None,
        };
        Self {
            symbol: row.trimmed_symbol().to_string(),
            exchange: defaults.exchange,
            product: row.product,
            side: row.side,
            qty: defaults.qty,
            entry_type: row.entry_type,
            entry_price,
            take_profit_signed: row.side.take_profit_offset(row.take_profit_distance),
            stop_loss_signed: row.side.stop_loss_offset(row.stop_loss_distance),
            batch_name: defaults.batch_name.clone(),
            memo: defaults.memo.clone(),
            run_mode: plan.mode(),
            scheduled_at: plan.scheduled_at(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
    pub fn exchange(&self) -> u32 {
        self.exchange
    }
    pub fn product(&self) -> Product {
        self.product
    }
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn qty(&self) -> u32 {
        self.qty
    }
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }
    pub fn entry_price(&self) -> Option<i64> {
        self.entry_price
    }
    pub fn take_profit_signed(&self) -> i64 {
        self.take_profit_signed
    }
    pub fn stop_loss_signed(&self) -> i64 {
        self.stop_loss_signed
    }
    pub fn batch_name(&self) -> &str {
        &self.batch_name
    }
    pub fn memo(&self) -> &str {
        &self.memo
    }
    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_at
    }
}

/// Serde helpers for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod schedule_format {
    use super::SCHEDULE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(SCHEDULE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, SCHEDULE_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::SCHEDULE_FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(dt: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_some(&dt.format(SCHEDULE_FORMAT).to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.map(|r| NaiveDateTime::parse_from_str(&r, SCHEDULE_FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

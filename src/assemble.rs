use crate::history::{column_names, purchase_history, weighted_average, PurchaseSlot, SourceStats};
use crate::join::{tagged, MergedRecord};
use crate::reconcile::Options;
use crate::value::Value;

/// The final figures for one product, combining both sources.
///
/// All per-source arrays are ordered as source A, then source B.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub key: Value,
    pub product_name: Value,
    pub stock: [i64; 2],
    pub highest_price: [f64; 2],
    pub average_price: [f64; 2],
    /// The average over the purchases of both sources, not the average of their averages.
    pub combined_average_price: f64,
    /// The purchase history of both sources, relayed as is, one entry per slot.
    pub history: Vec<[PurchaseSlot; 2]>,
    pub aged_quantity: [i64; 2],
    pub aged_value: f64,
}

impl OutputRow {
    pub fn total_stock(&self) -> i64 {
        self.stock[0].saturating_add(self.stock[1])
    }

    pub fn max_price(&self) -> f64 {
        self.highest_price[0].max(self.highest_price[1])
    }

    pub fn total_aged_quantity(&self) -> i64 {
        self.aged_quantity[0].saturating_add(self.aged_quantity[1])
    }

    /// The price weighted by quantity of the aged purchases alone.
    pub fn aged_average_price(&self) -> f64 {
        weighted_average(self.aged_value, self.total_aged_quantity())
    }

    /// Render this row as fields matching [`headers()`].
    pub fn fields(&self) -> Vec<String> {
        let mut out = vec![
            self.key.to_string(),
            self.product_name.to_string(),
            self.stock[0].to_string(),
            self.stock[1].to_string(),
            self.total_stock().to_string(),
            price(self.highest_price[0]),
            price(self.highest_price[1]),
            price(self.max_price()),
            price(self.average_price[0]),
            price(self.average_price[1]),
            price(self.combined_average_price),
        ];
        for slots in &self.history {
            for slot in slots {
                out.extend(slot.fields().into_iter().map(ToString::to_string));
            }
        }
        out.extend([
            self.aged_quantity[0].to_string(),
            self.aged_quantity[1].to_string(),
            self.total_aged_quantity().to_string(),
            price(self.aged_value),
            price(self.aged_average_price()),
        ]);
        out
    }
}

fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// The column names of the output table, in order.
pub fn headers(options: &Options) -> Vec<String> {
    let (a, b) = (options.source_a_tag.as_str(), options.source_b_tag.as_str());
    let mut out = vec![
        options.key_column.clone(),
        options.name_column.clone(),
        format!("{a} Stock"),
        format!("{b} Stock"),
        "Total Stock".into(),
        format!("Highest Price {a}"),
        format!("Highest Price {b}"),
        "Max Price".into(),
        format!("Weighted Average Price {a}"),
        format!("Weighted Average Price {b}"),
        "Weighted Average Price".into(),
    ];
    for index in 1..=options.history_limit {
        for tag in [a, b] {
            out.extend(column_names(index).iter().map(|column| tagged(column, tag)));
        }
    }
    let days = options.aging_days;
    out.extend([
        format!("{a} Stock > {days} Days"),
        format!("{b} Stock > {days} Days"),
        format!("Total Stock > {days} Days"),
        "Value of Aged Stock".into(),
        "WAP of Aged Stock".into(),
    ]);
    out
}

/// Build the output row for `record` from the statistics previously aggregated for each of its sources.
pub fn assemble(record: &MergedRecord, stats: [&SourceStats; 2], options: &Options) -> OutputRow {
    let tags = [options.source_a_tag.as_str(), options.source_b_tag.as_str()];
    let first_present = |column: &str| -> Option<Value> {
        tags.iter()
            .find_map(|tag| record.get_present(column, tag))
            .cloned()
    };
    let [a, b] = stats;
    let [history_a, history_b] =
        tags.map(|tag| purchase_history(record, tag, options.history_limit));

    OutputRow {
        key: first_present(&options.key_column).unwrap_or_else(|| Value::Text(record.key.clone())),
        product_name: first_present(&options.name_column).unwrap_or_default(),
        stock: tags.map(|tag| {
            record
                .get(&options.stock_column, tag)
                .map_or(0, Value::to_stock)
        }),
        highest_price: [a.highest_price, b.highest_price],
        average_price: [a.average_price(), b.average_price()],
        combined_average_price: weighted_average(
            a.total_value + b.total_value,
            a.total_quantity.saturating_add(b.total_quantity),
        ),
        history: history_a
            .into_iter()
            .zip(history_b)
            .map(|(slot_a, slot_b)| [slot_a, slot_b])
            .collect(),
        aged_quantity: [a.aged_quantity, b.aged_quantity],
        aged_value: a.aged_value + b.aged_value,
    }
}

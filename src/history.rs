//! Purchase history of a product as recorded by one source, and the price and aging figures derived from it.
use crate::date::parse_date;
use crate::join::MergedRecord;
use crate::value::Value;

/// One entry in the purchase history of a product, as found in the columns
/// `Qty <n>`, `Price <n>`, `Purchase Date <n>`, `Supplier <n>` and `Invoice No.<n>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PurchaseSlot {
    pub quantity: Value,
    pub price: Value,
    pub purchase_date: Value,
    pub supplier: Value,
    pub invoice_no: Value,
}

impl PurchaseSlot {
    /// Read the slot at the 1-based `index` from the fields `record` received from the source with `tag`.
    pub fn from_record(record: &MergedRecord, index: usize, tag: &str) -> Self {
        let [quantity, supplier, purchase_date, invoice_no, price] =
            column_names(index).map(|column| record.get(&column, tag).cloned().unwrap_or_default());
        PurchaseSlot {
            quantity,
            price,
            purchase_date,
            supplier,
            invoice_no,
        }
    }

    /// The fields of this slot in the order of [`column_names()`].
    pub fn fields(&self) -> [&Value; 5] {
        [
            &self.quantity,
            &self.supplier,
            &self.purchase_date,
            &self.invoice_no,
            &self.price,
        ]
    }

    /// Return quantity and unit price if this slot is a usable purchase, i.e. both are present and
    /// the quantity is positive.
    pub fn purchase(&self) -> Option<(i64, f64)> {
        if !(self.quantity.is_present() && self.price.is_present()) {
            return None;
        }
        let quantity = self.quantity.to_quantity()?;
        let price = self.price.to_price()?;
        (quantity > 0).then_some((quantity, price))
    }
}

/// The untagged names of all columns making up the slot at the 1-based `index`, in output order.
pub fn column_names(index: usize) -> [String; 5] {
    [
        format!("Qty {index}"),
        format!("Supplier {index}"),
        format!("Purchase Date {index}"),
        format!("Invoice No.{index}"),
        format!("Price {index}"),
    ]
}

/// Read the first `limit` purchase slots recorded for the source with `tag`.
pub fn purchase_history(record: &MergedRecord, tag: &str, limit: usize) -> Vec<PurchaseSlot> {
    (1..=limit)
        .map(|index| PurchaseSlot::from_record(record, index, tag))
        .collect()
}

/// The point in time before which a purchase counts as aged stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(time::OffsetDateTime);

impl Cutoff {
    /// Purchases made more than `aging_days` before `reference_time` are aged.
    pub fn new(reference_time: time::OffsetDateTime, aging_days: u32) -> Self {
        Cutoff(reference_time.saturating_sub(time::Duration::days(aging_days.into())))
    }

    /// The instant itself.
    pub fn instant(&self) -> time::OffsetDateTime {
        self.0
    }

    /// A purchase date counts from its very beginning.
    pub fn is_aged(&self, date: time::Date) -> bool {
        date.midnight().assume_utc() < self.0
    }
}

/// Price and aging figures of one source for one product.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceStats {
    pub highest_price: f64,
    pub total_value: f64,
    pub total_quantity: i64,
    pub aged_quantity: i64,
    pub aged_value: f64,
}

impl SourceStats {
    /// The price weighted by quantity across all usable purchases, or 0 if there are none.
    pub fn average_price(&self) -> f64 {
        weighted_average(self.total_value, self.total_quantity)
    }
}

/// Return `value / quantity`, or 0 if there is no quantity to divide by.
pub fn weighted_average(value: f64, quantity: i64) -> f64 {
    if quantity > 0 {
        value / quantity as f64
    } else {
        0.0
    }
}

/// Accumulate price and aging figures over `slots`, skipping all slots without a usable purchase.
pub fn aggregate(slots: &[PurchaseSlot], cutoff: &Cutoff) -> SourceStats {
    let mut stats = SourceStats::default();
    for slot in slots {
        let Some((quantity, price)) = slot.purchase() else {
            continue;
        };
        let value = quantity as f64 * price;
        stats.total_value += value;
        stats.total_quantity = stats.total_quantity.saturating_add(quantity);
        if price > stats.highest_price {
            stats.highest_price = price;
        }
        if parse_date(&slot.purchase_date).map_or(false, |date| cutoff.is_aged(date)) {
            stats.aged_quantity = stats.aged_quantity.saturating_add(quantity);
            stats.aged_value += value;
        }
    }
    stats
}

//! Report
//!
//! Renders an [`Allocation`] either as the plain `<method> <amount>` listing
//! or as tables of per-method totals and individual charges.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    allocator::{Allocation, ChargeKind},
    methods::PaymentMethods,
    money,
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the output failed
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Printable view of an allocation.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    allocation: &'a Allocation,
    methods: &'a PaymentMethods,
    currency: &'static Currency,
}

impl<'a> Report<'a> {
    /// Create a report, formatting table amounts in złoty.
    pub fn new(allocation: &'a Allocation, methods: &'a PaymentMethods) -> Self {
        Self {
            allocation,
            methods,
            currency: iso::PLN,
        }
    }

    /// Format table amounts in the given currency.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Write one `<method> <amount>` line per payment method, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if writing fails.
    pub fn write_plain(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        for (method_id, spent) in self.allocation.spent() {
            writeln!(out, "{method_id} {}", money::round(*spent))?;
        }

        Ok(())
    }

    /// Write per-method totals, the charge breakdown and a summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if writing fails.
    pub fn write_table(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        writeln!(out, "{}", self.methods_table())?;

        if !self.allocation.charges().is_empty() {
            writeln!(out, "{}", self.charges_table())?;
        }

        self.write_summary(&mut out)
    }

    fn methods_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Method", "Discount", "Limit", "Spent", "Remaining"]);

        for (_, method) in self.methods.iter() {
            let spent = self
                .allocation
                .spent_for(method.id())
                .unwrap_or(Decimal::ZERO);

            builder.push_record([
                method.id().to_string(),
                format!("{}%", method.discount_points()),
                self.format_money(method.limit()),
                self.format_money(spent),
                self.format_money(method.limit() - spent),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());

        table.to_string()
    }

    fn charges_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Order", "Method", "Payment", "Amount"]);

        for charge in self.allocation.charges() {
            builder.push_record([
                charge.order_id.clone(),
                charge.method_id.clone(),
                kind_label(charge.kind).to_string(),
                self.format_money(charge.amount),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        table.to_string()
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        writeln!(
            out,
            "Total charged:    {}",
            self.format_total(self.allocation.total_charged())
        )?;

        writeln!(
            out,
            "Discount granted: {}",
            self.format_total(self.allocation.discount_granted())
        )?;

        let unpaid = self.allocation.unpaid();

        if unpaid.is_empty() {
            writeln!(out, "Unpaid orders:    none")?;
        } else {
            writeln!(out, "Unpaid orders:    {}", unpaid.join(", "))?;
        }

        Ok(())
    }

    fn format_money(&self, amount: Decimal) -> String {
        Money::from_decimal(money::round(amount), self.currency).to_string()
    }

    fn format_total(&self, total: Option<Decimal>) -> String {
        total.map_or_else(|| "overflow".to_string(), |amount| self.format_money(amount))
    }
}

fn kind_label(kind: ChargeKind) -> &'static str {
    match kind {
        ChargeKind::PromoCard => "promo card",
        ChargeKind::FullPoints => "points",
        ChargeKind::MixedPoints => "points (split)",
        ChargeKind::MixedRemainder => "card (split)",
        ChargeKind::EscapeCard => "promo card (retry)",
        ChargeKind::FullPrice => "full price",
    }
}

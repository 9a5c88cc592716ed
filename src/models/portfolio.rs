//! Portfolio models

use chrono::NaiveDate;

/// A position held in the portfolio
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub shares: u32,
    pub avg_price: f64,
    pub current_price: f64,
    pub value: f64,
}

impl Holding {
    pub fn gain_loss_per_share(&self) -> f64 {
        self.current_price - self.avg_price
    }

    pub fn gain_loss(&self) -> f64 {
        self.gain_loss_per_share() * self.shares as f64
    }

    pub fn gain_loss_percent(&self) -> f64 {
        if self.avg_price == 0.0 {
            0.0
        } else {
            self.gain_loss_per_share() / self.avg_price * 100.0
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.avg_price * self.shares as f64
    }
}

/// Portfolio value on a given day
#[derive(Debug, Clone, PartialEq)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Share of the portfolio held in one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub symbol: String,
    pub shares: u32,
    pub value: f64,
    pub percent: f64,
}

/// Headline figures of the portfolio page
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub positions: usize,
    pub allocation: Vec<Allocation>,
}

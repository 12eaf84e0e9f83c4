pub mod assessment;
pub mod attempt;
pub mod health;
pub mod proctoring;

pub mod assessment;
pub mod attempt;
pub mod question;
pub mod response;
pub mod violation;

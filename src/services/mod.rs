pub mod assessment_service;
pub mod attempt_service;
pub mod availability_service;
pub mod proctoring_service;
pub mod scoring_service;
pub mod sweep_service;

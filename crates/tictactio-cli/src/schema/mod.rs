pub mod training_report;

pub mod use_cases;

pub use use_cases::bug_classification::BugClassificationUseCase;

pub mod engine;
pub mod frequency;
pub mod rolling;
pub mod scheduler;
pub mod watchdog;
pub mod window;

pub use engine::{Engine, EngineSettings};
pub use frequency::{FrequencyWindow, NO_DATA_LABEL};
pub use rolling::RollingAggregator;
pub use scheduler::RenderScheduler;
pub use watchdog::{IdleWatchdog, SyntheticSource};
pub use window::BoundedWindow;

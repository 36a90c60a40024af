pub mod bottleneck;

// Re-export commonly used types
pub use bottleneck::{
    classify, detect_bottlenecks, parse_rows, BottleneckDetector, BottleneckRow, BottleneckTable,
    EventStatus, RawEventRow,
};

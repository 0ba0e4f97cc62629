// Video Hunter state managers
// Managers hold client-side state that other components read.

pub mod download_registry;

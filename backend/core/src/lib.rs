pub mod descriptor;
pub mod error;
pub mod keys;
pub mod sim;
pub mod traits;
pub mod types;

pub use descriptor::{CommandDescriptor, FocusDiscipline, DEFAULT_FOCUS_DELAY_MS};
pub use error::{VoxError, VoxResult};
pub use keys::{Key, KeyChord, Modifier};
pub use sim::{DesktopCall, FaultPoint, SimulatedDesktop};
pub use traits::{AppLauncher, InputSynthesizer, WindowSource};
pub use types::{settle, Desktop, SettleTimings, WindowHandle};

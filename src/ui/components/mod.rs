mod banner;
mod command_palette;
mod key_result;

pub use banner::Banner;
pub use command_palette::{CommandPalette, PaletteEvent};
pub use key_result::KeyResult;

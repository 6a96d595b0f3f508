mod account;
mod campaign;
mod contact;
mod list;
mod persona;
mod platform;
mod template;

pub use account::*;
pub use campaign::*;
pub use contact::*;
pub use list::*;
pub use persona::*;
pub use platform::*;
pub use template::*;

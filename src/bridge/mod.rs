/*!
 * Host Bridge Module
 * JSON call/response surface of the `WifiBinding` plugin
 */

mod dispatch;
mod server;
mod types;

pub use dispatch::WifiBindingBridge;
pub use server::serve;
pub use types::*;

//! These models represent the objects passed around by the loops
//!
//! There are a few related formats we need to interact with:
//! - openai chat completion messages/tools, sent from a loop to the model gateway
//! - remote tool announcements and results, exchanged with tool providers
//! - the internal structs below, which every loop works on
//!
//! We always immediately convert the wire formats into these internal structs using
//! to/from helpers, see `providers::utils` and `mcp::protocol`.
pub mod message;
pub mod role;
pub mod tool;

//! # Furnstock Back-Office Entry Point
//!
//! ```text
//! furnstock [--json] [--config PATH] [--db PATH] <COMMAND>
//!
//!   category   list | add | delete
//!   product    list | discounted | show | add | update | set-price | delete
//!   supplier   list | show | add | delete | delete-by-inn
//!   employee   list | show | add
//!   delivery   record | list | show | report
//!   sale       record | list | show | report
//!   inventory  [--product PRODUCT] [--below N]
//! ```
//!
//! The actual setup is in lib.rs so commands can be tested in-process.

fn main() {
    std::process::exit(furnstock_backoffice::run());
}

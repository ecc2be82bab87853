// View controller: owns the Idle → Analyzing → Results | Error cycle and the
// view model the browser page renders from it.

pub mod controller;
pub mod handlers;
pub mod render;

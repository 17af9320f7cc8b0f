// Domain layer: Uom model, decimal value type and ports. No knowledge of HTTP or storage backends.

pub mod decimal;
pub mod model;
pub mod ports;

pub mod model_resolver;
pub mod rustface_detector;
pub mod single_flight_dispatcher;

//! Canonical structured event names used across `mqtt-pulsar-streamer`.

// Router events.
pub const ROUTE_RECEIVE: &str = "route_receive";
pub const ROUTE_TOPIC_REJECTED: &str = "route_topic_rejected";
pub const ROUTE_PRODUCER_UNAVAILABLE: &str = "route_producer_unavailable";
pub const ROUTE_SEND_OK: &str = "route_send_ok";
pub const ROUTE_SEND_FAILED: &str = "route_send_failed";
pub const ROUTE_DROP_SHUTTING_DOWN: &str = "route_drop_shutting_down";

// Producer registry events.
pub const PRODUCER_CREATE_START: &str = "producer_create_start";
pub const PRODUCER_CREATE_OK: &str = "producer_create_ok";
pub const PRODUCER_CREATE_FAILED: &str = "producer_create_failed";
pub const PRODUCER_CREATE_AFTER_CLOSE: &str = "producer_create_after_close";
pub const PRODUCER_CLOSE_OK: &str = "producer_close_ok";
pub const PRODUCER_CLOSE_FAILED: &str = "producer_close_failed";

// Shutdown lifecycle events.
pub const SHUTDOWN_START: &str = "shutdown_start";
pub const SHUTDOWN_ALREADY_STARTED: &str = "shutdown_already_started";
pub const SHUTDOWN_PRODUCERS_CLOSED: &str = "shutdown_producers_closed";
pub const SHUTDOWN_INBOUND_DISCONNECT_OK: &str = "shutdown_inbound_disconnect_ok";
pub const SHUTDOWN_INBOUND_DISCONNECT_FAILED: &str = "shutdown_inbound_disconnect_failed";
pub const SHUTDOWN_OUTBOUND_CLOSE_OK: &str = "shutdown_outbound_close_ok";
pub const SHUTDOWN_OUTBOUND_CLOSE_FAILED: &str = "shutdown_outbound_close_failed";
pub const SHUTDOWN_EXPORTER_FLUSH_FAILED: &str = "shutdown_exporter_flush_failed";
pub const SHUTDOWN_EXPORTER_STOP_OK: &str = "shutdown_exporter_stop_ok";
pub const SHUTDOWN_EXPORTER_STOP_FAILED: &str = "shutdown_exporter_stop_failed";
pub const SHUTDOWN_COMPLETE: &str = "shutdown_complete";

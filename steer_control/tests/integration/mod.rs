mod gating;
mod live_tune;
mod tracking;

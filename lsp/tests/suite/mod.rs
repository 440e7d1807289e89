mod assembly;
mod concurrency;
mod properties;
mod round_trip;

mod listing;
mod resolve;

mod serve;
mod settings;
mod spawn;

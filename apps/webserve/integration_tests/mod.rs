mod console;
mod helpers;
mod lifecycle;

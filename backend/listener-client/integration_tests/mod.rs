mod controller;
mod helpers;
mod session;

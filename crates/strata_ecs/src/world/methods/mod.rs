mod access;
mod arche;
mod despawn;
mod exchange;
mod filter;
mod notify;
mod register;
mod relation;
mod spawn;

mod export;
mod extract;
mod links;

pub mod commands;
mod email;
mod environment;
#[cfg(test)]
mod tests;

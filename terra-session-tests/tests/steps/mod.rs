mod pairing_steps;
mod replication_steps;

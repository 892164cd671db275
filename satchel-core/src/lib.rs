mod client;

pub use client::{DriveClient, DriveError, Resource, ResourceList, ResourceType, TransferLink};

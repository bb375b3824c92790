use crate::memcache::store::{self, MemcStore};
use crate::protocol::text::command::{RetrievalCommand, StorageCommand, StorageOperation};
use crate::protocol::text::decoder::TextRequest;
use crate::protocol::text::encoder::{storage_error_to_response, RetrievedValue, TextResponse};
use bytes::Bytes;

/// Dispatches decoded requests to the store and builds the replies.
pub struct TextHandler {
    storage: MemcStore,
}

impl TextHandler {
    pub fn new(storage: MemcStore) -> TextHandler {
        TextHandler { storage }
    }

    /// Returns `None` when the client asked for no reply.
    pub fn handle_request(&mut self, req: TextRequest) -> Option<TextResponse> {
        match req {
            TextRequest::Retrieval(command) => Some(self.get(command)),
            TextRequest::Storage { command, value } => {
                let noreply = command.noreply;
                let response = self.store(command, value);
                if noreply {
                    return None;
                }
                Some(response)
            }
            TextRequest::Error(err) => Some(TextResponse::Error(err)),
        }
    }

    pub fn storage(&self) -> &MemcStore {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut MemcStore {
        &mut self.storage
    }

    fn get(&mut self, command: RetrievalCommand) -> TextResponse {
        let with_cas = command.with_cas;
        let values = command
            .keys
            .into_iter()
            .filter_map(|key| {
                let record = self.storage.get(&key).ok()?;
                Some(RetrievedValue {
                    flags: record.header().flags().clone(),
                    value: record.value().clone(),
                    cas: with_cas.then(|| record.header().cas()),
                    key,
                })
            })
            .collect();
        TextResponse::Values(values)
    }

    fn store(&mut self, command: StorageCommand, value: Bytes) -> TextResponse {
        let key = command.key;
        let ttl = command.time_to_live;
        let record = store::Record::new(value, command.flags);
        let result = match command.operation {
            StorageOperation::Set => self.storage.set(key, record, ttl),
            StorageOperation::Add => self.storage.add(key, record, ttl),
            StorageOperation::Replace => self.storage.replace(key, record, ttl),
            StorageOperation::Append => self.storage.append(key, record),
            StorageOperation::Prepend => self.storage.prepend(key, record),
            StorageOperation::Cas(cas) => self.storage.cas(key, record, ttl, cas),
        };
        match result {
            Ok(status) => {
                trace!("Stored with cas {}", status.cas);
                TextResponse::Stored
            }
            Err(err) => storage_error_to_response(err),
        }
    }
}

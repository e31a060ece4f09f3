// REST binding for the booking server
// Reads go through retry with backoff; mutations are sent exactly once

use super::wire::{ErrorBody, MeetingPayload, MeetingRecord, RoomRecord};
use super::{EventStore, RoomCatalog, StoreError};
use crate::http_config::HttpConfig;
use crate::models::{Event, EventUpdate, NewEvent, Room};
use crate::utils::logging::log_network_error;
use crate::utils::retry::{retry_with_exponential_backoff, RetryConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpEventStore {
    client: Client,
    /// Used for create/update/delete; defaults to `client`.
    write_client: Client,
    base_url: Url,
    read_retry: RetryConfig,
}

impl HttpEventStore {
    pub fn new(client: Client, base_url: Url, read_retry: RetryConfig) -> Self {
        Self {
            write_client: client.clone(),
            client,
            base_url,
            read_retry,
        }
    }

    pub fn with_write_client(mut self, client: Client) -> Self {
        self.write_client = client;
        self
    }

    /// Reads tuned by `reads`, mutations by `writes`.
    pub fn from_config(base_url: Url, reads: &HttpConfig, writes: &HttpConfig) -> Result<Self, StoreError> {
        let store = Self::new(reads.build_client()?, base_url, reads.to_retry_config());
        Ok(store.with_write_client(writes.build_client()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| StoreError::transport(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn get_with_retry<T: DeserializeOwned>(&self, operation: &str, url: Url) -> Result<T, StoreError> {
        let result = retry_with_exponential_backoff(&self.read_retry, || self.get_json::<T>(url.clone())).await;
        if let Err(e) = &result {
            log_network_error(operation, e);
        }
        result
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn list(&self, room_id: &str) -> Result<Vec<Event>, StoreError> {
        let mut url = self.endpoint(&["api", "meetings"])?;
        url.query_pairs_mut().append_pair("roomId", room_id);
        let records: Vec<MeetingRecord> = self.get_with_retry("list meetings", url).await?;
        Ok(records.into_iter().map(MeetingRecord::into_event).collect())
    }

    async fn create(&self, event: &NewEvent) -> Result<Event, StoreError> {
        let url = self.endpoint(&["api", "meetings"])?;
        debug!("POST {}", url);
        let response = self
            .write_client
            .post(url)
            .json(&MeetingPayload::from(event))
            .send()
            .await?;
        let record: MeetingRecord = read_json(response).await?;
        Ok(record.into_event())
    }

    async fn update(&self, id: &str, update: &EventUpdate) -> Result<Event, StoreError> {
        let url = self.endpoint(&["api", "meetings", id])?;
        debug!("PUT {}", url);
        let response = self
            .write_client
            .put(url)
            .json(&MeetingPayload::from(update))
            .send()
            .await?;
        let record: MeetingRecord = read_json(response).await?;
        Ok(record.into_event())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&["api", "meetings", id])?;
        debug!("DELETE {}", url);
        let response = self.write_client.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RoomCatalog for HttpEventStore {
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let url = self.endpoint(&["api", "rooms"])?;
        let records: Vec<RoomRecord> = self.get_with_retry("list rooms", url).await?;
        Ok(records.into_iter().map(RoomRecord::into_room).collect())
    }

    async fn get_room(&self, room_id: &str) -> Result<Room, StoreError> {
        let url = self.endpoint(&["api", "rooms", room_id])?;
        let record: RoomRecord = self.get_with_retry("get room", url).await?;
        Ok(record.into_room())
    }

    async fn availability(&self, date: NaiveDate) -> Result<Vec<Room>, StoreError> {
        let day = date.format("%Y-%m-%d").to_string();
        let url = self.endpoint(&["api", "rooms", "availability", &day])?;
        let records: Vec<RoomRecord> = self.get_with_retry("room availability", url).await?;
        Ok(records.into_iter().map(RoomRecord::into_room).collect())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });
    Err(StoreError::status(status.as_u16(), message))
}

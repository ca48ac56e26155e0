//! Scripted backend, standing in for a socket read loop.
use bytes::Bytes;
use pgscan::{Response, backend::DataRow, source::ChannelSource};
use tokio::sync::mpsc;

/// Spawn a task that send `responses` in order, as if read from the socket.
pub fn scripted(responses: Vec<Response>) -> ChannelSource {
    let (send, recv) = mpsc::channel(4);
    tokio::spawn(async move {
        for response in responses {
            if send.send(response).await.is_err() {
                break;
            }
        }
    });
    ChannelSource::new(recv)
}

pub fn data_row(columns: impl IntoIterator<Item = Option<Vec<u8>>>) -> Response {
    Response::DataRow(DataRow::new(columns.into_iter().map(|e| e.map(Bytes::from)).collect()))
}

use game_types::{RoomId, ServerMessage, SocketId};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: SocketId,
    pub room_id: Option<RoomId>,
    pub connected_at: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: SocketId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let connection = Self {
            id,
            room_id: None,
            connected_at: Instant::now(),
            sender,
        };

        (connection, receiver)
    }

    pub fn set_room(&mut self, room_id: Option<RoomId>) {
        self.room_id = room_id;
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }
}

pub struct ConnectionManager {
    connections: RwLock<HashMap<SocketId, Connection>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: SocketId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, conn);
        }

        receiver
    }

    pub async fn remove_connection(&self, id: SocketId) {
        let mut connections = self.connections.write().await;
        connections.remove(&id);
    }

    pub async fn get_connection(&self, id: SocketId) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    pub async fn send_to_connection(
        &self,
        id: SocketId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(&id) {
            connection.send_message(message)
        } else {
            Err("Connection not found".to_string())
        }
    }

    /// Broadcast to every connection currently assigned to the room. Send
    /// failures mean the socket is already on its way out; they are dropped.
    pub async fn send_to_room(&self, room_id: &RoomId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for connection in connections.values() {
            if connection.room_id.as_ref() == Some(room_id) {
                let _ = connection.send_message(message.clone());
            }
        }
    }

    pub async fn set_connection_room(&self, id: SocketId, room_id: Option<RoomId>) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.set_room(room_id);
        }
    }

    pub async fn connections_in_room(&self, room_id: &RoomId) -> Vec<SocketId> {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|conn| conn.room_id.as_ref() == Some(room_id))
            .map(|conn| conn.id)
            .collect()
    }

    // Test helper method
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_creation_and_removal() {
        let manager = ConnectionManager::new();
        let socket_id = SocketId::new();

        let _receiver = manager.create_connection(socket_id).await;
        assert_eq!(manager.connection_count().await, 1);

        manager.remove_connection(socket_id).await;
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_message_sending_to_nonexistent_connection() {
        let manager = ConnectionManager::new();
        let socket_id = SocketId::new();

        let result = manager
            .send_to_connection(socket_id, ServerMessage::NoRoomsAvailable)
            .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "Connection not found");
    }

    #[tokio::test]
    async fn test_message_sending_after_connection_close() {
        let manager = ConnectionManager::new();
        let socket_id = SocketId::new();

        let receiver = manager.create_connection(socket_id).await;
        drop(receiver); // Close the receiver to simulate connection close

        let result = manager
            .send_to_connection(socket_id, ServerMessage::NoRoomsAvailable)
            .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "Connection closed");
    }

    #[tokio::test]
    async fn test_room_assignment_and_broadcast() {
        let manager = ConnectionManager::new();
        let id1 = SocketId::new();
        let id2 = SocketId::new();
        let outsider = SocketId::new();
        let room = RoomId::from("0042");

        let mut receiver1 = manager.create_connection(id1).await;
        let mut receiver2 = manager.create_connection(id2).await;
        let mut receiver3 = manager.create_connection(outsider).await;

        manager.set_connection_room(id1, Some(room.clone())).await;
        manager.set_connection_room(id2, Some(room.clone())).await;

        manager
            .send_to_room(&room, ServerMessage::BeginGame)
            .await;

        assert!(receiver1.try_recv().is_ok());
        assert!(receiver2.try_recv().is_ok());
        assert!(receiver3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connections_in_room() {
        let manager = ConnectionManager::new();
        let id1 = SocketId::new();
        let id2 = SocketId::new();
        let room = RoomId::from("0001");

        let _r1 = manager.create_connection(id1).await;
        let _r2 = manager.create_connection(id2).await;
        manager.set_connection_room(id1, Some(room.clone())).await;

        let in_room = manager.connections_in_room(&room).await;
        assert_eq!(in_room, vec![id1]);
    }
}

//! Chat gRPC Service

use std::sync::Arc;

use axum::http::StatusCode;
use tonic::server::NamedService;
use tonic::service::RoutesBuilder;
use tonic::{Request, Response, Status};
use tracing::{error, warn};

use super::proto::chat_service_server::{ChatService, ChatServiceServer};
use super::proto::{GetUserRequest, SendMessageReply, SendMessageRequest, User};
use super::registry::GrpcService;
use crate::application::dto;
use crate::application::services::{
    ConnService, SendMessageDto, SendMessageFailure, UserDto, UserError, UserService,
};
use crate::shared::validation::validate;

/// `chat.v1.ChatService` over the shared usecases.
#[derive(Clone)]
pub struct ChatGrpcService {
    users: Arc<dyn UserService>,
    conns: Arc<dyn ConnService>,
}

impl ChatGrpcService {
    pub fn new(users: Arc<dyn UserService>, conns: Arc<dyn ConnService>) -> Self {
        Self { users, conns }
    }
}

impl GrpcService for ChatGrpcService {
    fn name(&self) -> &'static str {
        <ChatServiceServer<ChatGrpcService> as NamedService>::NAME
    }

    fn register(&self, routes: &mut RoutesBuilder) {
        routes.add_service(ChatServiceServer::new(self.clone()));
    }
}

#[tonic::async_trait]
impl ChatService for ChatGrpcService {
    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let user_id = request.into_inner().user_id;
        let user = self.users.get_user(user_id).await.map_err(user_status)?;
        Ok(Response::new(user.into()))
    }

    async fn send_message(
        &self,
        request: Request<SendMessageRequest>,
    ) -> Result<Response<SendMessageReply>, Status> {
        let req = request.into_inner();

        let body = dto::SendMessageRequest {
            sender_id: req.sender_id,
            recipient_id: req.recipient_id,
            text: req.text,
        };
        validate(&body).map_err(|e| Status::invalid_argument(e.to_string()))?;

        let message = self
            .conns
            .send_message(SendMessageDto {
                sender_id: body.sender_id,
                recipient_id: body.recipient_id,
                text: body.text,
            })
            .await
            .map_err(send_status)?;

        Ok(Response::new(SendMessageReply {
            message_id: message.id,
            created_at: message.created_at.to_rfc3339(),
        }))
    }
}

impl From<UserDto> for User {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id,
            login: user.login,
            name: user.name,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

fn user_status(err: UserError) -> Status {
    match err {
        UserError::NotFound(_) => Status::not_found(err.to_string()),
        UserError::LoginTaken(_) => Status::already_exists(err.to_string()),
        UserError::Internal(e) => {
            error!(error = %e, "GetUser failed");
            Status::internal("internal error")
        }
    }
}

fn send_status(failure: SendMessageFailure) -> Status {
    let code = match failure.status {
        StatusCode::BAD_REQUEST => tonic::Code::InvalidArgument,
        StatusCode::NOT_FOUND => tonic::Code::NotFound,
        StatusCode::CONFLICT => tonic::Code::AlreadyExists,
        _ => tonic::Code::Internal,
    };

    if code == tonic::Code::Internal {
        error!(error = %failure.source, "{}", failure.message);
    } else {
        warn!(error = %failure.source, "{}", failure.message);
    }

    Status::new(code, failure.message)
}

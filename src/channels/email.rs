use async_trait::async_trait;
use tracing::info;

use crate::{
    clients::mailer::MailerClient,
    error::DeliveryError,
    models::envelope::EmailEnvelope,
    templates::TemplateKind,
    worker::{ChannelHandler, Outcome},
};

pub struct EmailChannel {
    mailer: MailerClient,
}

impl EmailChannel {
    pub fn new(mailer: MailerClient) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl ChannelHandler for EmailChannel {
    type Envelope = EmailEnvelope;

    fn channel(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, envelope: EmailEnvelope) -> Result<Outcome, DeliveryError> {
        let to = envelope
            .user_email
            .as_deref()
            .filter(|address| !address.is_empty())
            .ok_or(DeliveryError::MissingAddress)?;

        let rendered =
            TemplateKind::from_code(&envelope.template_code).render_email(&envelope.variables);

        self.mailer
            .send(to, &rendered)
            .await
            .map_err(DeliveryError::Send)?;

        info!(request_id = %envelope.request_id, to, "Email delivered");

        Ok(Outcome::Delivered)
    }
}

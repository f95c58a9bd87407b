use super::Controller;
use crate::{Banner, ReviewSession};
use tracing::{debug, info, warn};

impl Controller {
    pub async fn start_review(&self) {
        match self.api.review_queue().await {
            Ok(queue) if queue.is_empty() => self.set_banner(Banner::info("No flashcards due for review!")),
            Ok(queue) => {
                info!(cards = queue.len(), "review session started");
                self.update(|s| {
                    s.modal = None;
                    s.banner = None;
                    s.review = Some(ReviewSession::new(queue));
                });
            }
            Err(err) => self.fail(err.into(), "Failed to load review queue"),
        }
    }

    pub fn reveal_answer(&self) {
        self.update(|s| {
            if let Some(review) = s.review.as_mut() {
                review.revealed = !review.is_finished();
            }
        });
    }

    /// Record the verdict for the card on screen and move to the next one.
    ///
    /// The submission runs in the background; the session advances without waiting for it.
    /// Ignored until the answer has been revealed.
    pub async fn answer(&self, correct: bool) {
        let card = {
            let mut s = self.state.lock();
            let (card, finished) = {
                let Some(review) = s.review.as_mut() else { return };
                if !review.revealed {
                    return;
                }
                let Some(card) = review.current().cloned() else { return };
                review.index += 1;
                review.revealed = false;
                (card, review.is_finished())
            };
            if finished {
                s.review = None;
                s.banner = Some(Banner::success("Review session complete!"));
                info!("review session complete");
            }
            card
        };

        let api = self.api.clone();
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            match api.review_flashcard(card.id, correct, card.difficulty).await {
                Ok(_) => debug!(card_id = card.id, correct, "review recorded"),
                Err(err) => {
                    warn!(card_id = card.id, error = %err, "review submission failed");
                    state.lock().banner = Some(Banner::error(err.user_message("Failed to record review")));
                }
            }
        });
        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Drop the rest of the queue. There is no resume.
    pub fn abandon_review(&self) {
        self.update(|s| {
            if let Some(review) = s.review.take() {
                debug!(remaining = review.queue.len() - review.index, "review session abandoned");
            }
        });
    }

    /// Wait for every background review submission to settle.
    pub async fn flush_reviews(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "review submission task failed");
            }
        }
    }
}

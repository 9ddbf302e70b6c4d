use crate::account::CredentialStore;
use crate::card::{sort_by_creation, CardStore};
use crate::error::OrbitError;

/// Print every identity (without hashes) and every card.
pub async fn handle_dump_command(
    credentials: &dyn CredentialStore,
    cards: &dyn CardStore,
) -> Result<(), OrbitError> {
    let identities = credentials.list().await?;
    println!("Identities ({}):", identities.len());
    for identity in identities {
        println!(
            " - #{} {} [{}] created {}",
            identity.id,
            identity.username,
            identity.role,
            identity.created_at.to_rfc3339()
        );
    }

    let mut all_cards = cards.list().await?;
    sort_by_creation(&mut all_cards);
    println!("\nCards ({}):", all_cards.len());
    for card in all_cards {
        println!(
            " - {} | {} | {} | {} | {} | {} | by {} at {}",
            card.identifier,
            card.status,
            card.estimate,
            card.category,
            card.unit,
            card.supplier,
            card.created_by,
            card.created_at.to_rfc3339()
        );
    }
    Ok(())
}

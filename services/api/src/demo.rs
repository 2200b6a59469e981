use crate::infra::InMemoryPetStore;
use adopet::error::AppError;
use adopet::workflows::adoption::{
    AdoptionConfig, AdoptionService, Identity, ImageRef, Pet, PetSubmission, UserId,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Name of the pet listed during the demo
    #[arg(long, default_value = "Rex")]
    pub(crate) pet_name: String,
    /// Stop after the visit is booked, leaving the adoption open
    #[arg(long)]
    pub(crate) skip_conclusion: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        pet_name,
        skip_conclusion,
    } = args;

    let service = AdoptionService::new(
        Arc::new(InMemoryPetStore::default()),
        AdoptionConfig::default(),
    );

    println!("Adoption workflow demo");
    let owner = demo_user("u1", "Ursula", "+1 555 0101");
    let visitor = demo_user("u2", "Victor", "+1 555 0202");
    println!("- Owner {} and visitor {}", owner.name, visitor.name);

    let submission = PetSubmission {
        name: Some(pet_name),
        age: Some("2".to_string()),
        weight: Some("10".to_string()),
        color: Some("brown".to_string()),
        images: vec![ImageRef("a.jpg".to_string())],
    };
    let pet = service.create(&owner, submission)?;
    let id = pet.id.to_string();
    render_pet("Listed", &pet);

    let listed = service.list_all()?;
    println!("- Catalogue now holds {} pet(s)", listed.len());

    match service.schedule_visit(&owner, &id) {
        Ok(_) => println!("- Unexpected: owner booked a visit"),
        Err(err) => println!("- Owner visit rejected: {err}"),
    }

    let confirmation = service.schedule_visit(&visitor, &id)?;
    println!("- {}", confirmation.message);
    render_pet("After visit", &service.get(&id)?);

    if skip_conclusion {
        return Ok(());
    }

    let concluded = service.conclude_adoption(&owner, &id)?;
    render_pet("Concluded", &concluded);

    match service.schedule_visit(&visitor, &id) {
        Ok(_) => println!("- Unexpected: repeat visit accepted"),
        Err(err) => println!("- Repeat visit rejected: {err}"),
    }

    let adoptions = service.list_by_adopter(&visitor)?;
    match serde_json::to_string_pretty(&adoptions) {
        Ok(json) => println!("\n{}'s adoptions:\n{}", visitor.name, json),
        Err(err) => println!("\nAdoption payload unavailable: {}", err),
    }

    Ok(())
}

fn demo_user(id: &str, name: &str, phone: &str) -> Identity {
    Identity {
        id: UserId(id.to_string()),
        name: name.to_string(),
        image: None,
        phone: Some(phone.to_string()),
    }
}

fn render_pet(label: &str, pet: &Pet) {
    let adopter = pet
        .adopter
        .as_ref()
        .map(|adopter| adopter.name.as_str())
        .unwrap_or("none");
    println!(
        "- {}: {} ({}, {} years, {} kg) | status {} | adopter {}",
        label,
        pet.attributes.name,
        pet.attributes.color,
        pet.attributes.age,
        pet.attributes.weight,
        pet.status().label(),
        adopter
    );
}

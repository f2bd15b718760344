use std::time::{Duration, Instant};

use vrsync_shared::Address64;

use crate::tasks::{TaskKind, TaskScheduler};

/// Pointer interaction delivered to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    HoverEnter,
    HoverExit,
    Select,
    Deselect,
}

/// What an interactable entity can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    OutlineOnly,
    OutlinePopup,
    Button,
}

/// Visible consequence of an interaction, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEffect {
    Outline(bool),
    ShowPopup,
    HidePopup,
    Pressed,
    Released,
}

pub struct Interactable {
    address: Address64,
    capability: Capability,
    hovered: bool,
    selected: bool,
    outlined: bool,
}

impl Interactable {
    pub fn new(address: Address64, capability: Capability) -> Self {
        Self {
            address,
            capability,
            hovered: false,
            selected: false,
            outlined: false,
        }
    }

    pub fn address(&self) -> Address64 {
        self.address
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_outlined(&self) -> bool {
        self.outlined
    }

    fn set_outline(&mut self, on: bool, effects: &mut Vec<InteractionEffect>) {
        if self.outlined != on {
            self.outlined = on;
            effects.push(InteractionEffect::Outline(on));
        }
    }

    /// Applies `event`, starting popup fades on `scheduler` under this
    /// entity's address. Repeated events produce no effects.
    pub fn handle(
        &mut self,
        event: InteractionEvent,
        scheduler: &mut TaskScheduler<Address64>,
        fade: Duration,
        now: Instant,
    ) -> Vec<InteractionEffect> {
        let mut effects = Vec::new();
        match event {
            InteractionEvent::HoverEnter => {
                if self.hovered {
                    return effects;
                }
                self.hovered = true;
                if !self.selected {
                    self.set_outline(true, &mut effects);
                }
            }
            InteractionEvent::HoverExit => {
                if !self.hovered {
                    return effects;
                }
                self.hovered = false;
                if !self.selected || self.capability == Capability::Button {
                    self.set_outline(false, &mut effects);
                }
            }
            InteractionEvent::Select => {
                if self.selected {
                    return effects;
                }
                self.selected = true;
                match self.capability {
                    Capability::OutlineOnly => {
                        if !self.hovered {
                            self.set_outline(true, &mut effects);
                        }
                    }
                    Capability::OutlinePopup => {
                        if !self.hovered {
                            self.set_outline(true, &mut effects);
                        }
                        scheduler.start(self.address, TaskKind::FadeIn, fade, now);
                        effects.push(InteractionEffect::ShowPopup);
                    }
                    Capability::Button => effects.push(InteractionEffect::Pressed),
                }
            }
            InteractionEvent::Deselect => {
                if !self.selected {
                    return effects;
                }
                self.selected = false;
                match self.capability {
                    Capability::OutlineOnly => {
                        if !self.hovered {
                            self.set_outline(false, &mut effects);
                        }
                    }
                    Capability::OutlinePopup => {
                        if !self.hovered {
                            self.set_outline(false, &mut effects);
                        }
                        scheduler.start(self.address, TaskKind::FadeOut, fade, now);
                        effects.push(InteractionEffect::HidePopup);
                    }
                    Capability::Button => effects.push(InteractionEffect::Released),
                }
            }
        }
        effects
    }
}

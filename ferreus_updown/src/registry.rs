/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds the runtime kernel selector from the registry of bilinear forms.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::{
    kernel::{BilinearKernel, Cell, KernelDescriptor},
    kernels::{
        MassKernel, StiffnessKernel, TestGradientKernel, TrialGradientKernel, WeightedMassKernel,
    },
};

macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry.
        ///
        /// Used as the per-dimension entry of a kernel mapping; dispatches to
        /// the concrete kernel type registered under each variant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum KernelType {
            $( $V, )*
        }

        impl KernelType {
            /// Every registered kernel, in registry order.
            pub const ALL: &'static [KernelType] = &[ $( KernelType::$V, )* ];
        }

        impl BilinearKernel for KernelType {
            #[inline(always)]
            fn down(&self, cell: &Cell, fl: f64, fr: f64, alpha: f64) -> f64 {
                match self {
                    $( KernelType::$V => <$Kty as Default>::default().down(cell, fl, fr, alpha), )*
                }
            }

            #[inline(always)]
            fn up(&self, cell: &Cell, alpha: f64) -> (f64, f64) {
                match self {
                    $( KernelType::$V => <$Kty as Default>::default().up(cell, alpha), )*
                }
            }

            #[inline]
            fn level_zero(&self, q: f64, t: f64) -> [[f64; 2]; 2] {
                match self {
                    $( KernelType::$V => <$Kty as Default>::default().level_zero(q, t), )*
                }
            }

            #[inline]
            fn descriptor(&self) -> KernelDescriptor {
                match self {
                    $( KernelType::$V => <$Kty as Default>::default().descriptor(), )*
                }
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (Mass, MassKernel),
        (Stiffness, StiffnessKernel),
        (TrialGradient, TrialGradientKernel),
        (TestGradient, TestGradientKernel),
        (WeightedMass, WeightedMassKernel),
    ]
}

impl KernelType {
    /// The kernel whose matrix is the transpose of this one.
    pub fn transpose(self) -> KernelType {
        match self {
            KernelType::TrialGradient => KernelType::TestGradient,
            KernelType::TestGradient => KernelType::TrialGradient,
            other => other,
        }
    }
}
